mod client;

pub use client::Client;
pub use client::ClientFormData;
pub use client::ClientStatus;
