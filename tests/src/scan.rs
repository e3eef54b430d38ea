mod empty;
mod http;
mod rtsp;
mod support;
