pub mod tcp;
pub mod traits;

pub use tcp::TcpAcceptor;
pub use traits::{TransportAcceptor, TransportStream};
