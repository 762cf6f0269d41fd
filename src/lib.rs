pub mod decoder;
pub mod dynamic_table;
pub mod encoder;
mod error;
pub mod field;
mod helper;
pub mod huffman;
pub mod integer;
pub mod static_table;
pub mod string;

pub use decoder::{Decoder, HeaderEvent};
pub use dynamic_table::DynamicTable;
pub use encoder::Encoder;
pub use error::{HpackError, HpackResult};
pub use field::HeaderField;
pub use helper::Helper;
pub use huffman::{HuffmanDecoder, HuffmanEncoder};
pub use string::HuffmanPolicy;

/// 默认的header table最大长度值
pub const DEFAULT_SETTINGS_HEADER_TABLE_SIZE: usize = 4_096;
