//! Side effect free codecs for the protocols the scanner speaks.

pub mod media;
pub mod rtsp;
