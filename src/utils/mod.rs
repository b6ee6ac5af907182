pub mod gist;
pub mod sos;
