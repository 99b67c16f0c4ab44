pub mod io;
pub mod nexus;
