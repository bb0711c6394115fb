//! 스코어링 도메인 모델.

mod factor;
mod inputs;
mod market_data;
mod provider;
mod scoring_result;
mod signal;
mod weights;

pub use factor::*;
pub use inputs::*;
pub use market_data::*;
pub use provider::*;
pub use scoring_result::*;
pub use signal::*;
pub use weights::*;
