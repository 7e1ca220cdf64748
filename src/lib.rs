//! An incremental build engine driven by file timestamps.
//!
//! ```no_run
//! use freshen::{Action, Engine, Request};
//!
//! let mut engine = Engine::new()?;
//! let mut copy = Action::direct(|params| {
//!     std::fs::copy(params.paths("src")[0].as_path(), params.paths("dst")[0].as_path())?;
//!     Ok(())
//! });
//! let req = Request::new().target("dst", "out/t").source("src", "s");
//! engine.build(&mut copy, &req)?;
//! # Ok::<(), freshen::BuildError>(())
//! ```

pub mod action;
pub mod canon;
pub mod engine;
pub mod error;
pub mod fs;
pub mod params;
pub mod process;
#[cfg(unix)]
mod process_posix;
pub mod registry;
pub mod request;
pub mod run;
pub mod template;

pub use action::Action;
pub use engine::{Engine, Options, Outcome, Status};
pub use error::BuildError;
pub use params::{Params, Value};
pub use request::{PathSpec, Request};
