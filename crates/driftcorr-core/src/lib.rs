pub mod consts;
pub mod drift;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod region;
pub mod register;
pub mod report;
pub mod source;
