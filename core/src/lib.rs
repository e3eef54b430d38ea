pub mod credentials;
pub mod fingerprint;
pub mod network;
pub mod profiles;
pub mod scanner;
pub mod session;
pub mod sink;
pub mod vendors;
pub mod verifier;
