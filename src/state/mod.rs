pub mod pool;
pub mod position;
pub mod tick;
pub mod tick_array;

pub use pool::{Pool, RewardInfo, NUM_REWARDS};
pub use position::{Position, PositionRewardInfo};
pub use tick::Tick;
pub use tick_array::{TickArray, TICKS_PER_ARRAY};
