pub mod answer_encoder;
pub mod dnskey;

pub use answer_encoder::HickoryAnswerEncoder;
pub use dnskey::DnskeyRecord;
