mod reader;
mod writer;

pub use reader::{XmlReadError, XmlStreamReader};
pub use writer::{XmlStreamWriter, XmlWriteError};
