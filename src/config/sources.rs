pub mod environment;
pub mod global_file;
pub mod workdir_file;
