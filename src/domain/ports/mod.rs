mod image_decoder_port;
mod image_listener_port;
mod transport_port;

pub use image_decoder_port::ImageDecoderPort;
pub use image_listener_port::{FnListener, ImageListener};
pub use transport_port::TransportPort;

#[cfg(test)]
pub use transport_port::MockTransportPort;
