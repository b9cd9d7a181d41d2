// Here's the list of the MFTP commands implemented
pub mod abor;
pub mod chwd;
pub mod dele;
pub mod feat;
pub mod list;
pub mod noop;
pub mod pass;
pub mod pwdr;
pub mod quit;
pub mod retr;
pub mod size;
pub mod stor;
pub mod user;
pub mod wami;

pub mod handlers;

// The utils and common functions are here
pub mod utils;
