pub mod http;
pub mod rtsp;
pub mod tcp;
