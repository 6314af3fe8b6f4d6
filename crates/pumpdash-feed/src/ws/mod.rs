/*
[INPUT]:  Feed endpoints, session configuration, caller commands
[OUTPUT]: Live feed sessions merging updates into the dashboard store
[POS]:    WebSocket layer - real-time state synchronization
[UPDATE]: When adding new feeds or changing connection logic
*/

pub mod codec;
pub mod endpoint;
pub mod feed;
pub mod liveness;
pub mod session;

pub use codec::{ClientFrame, FrameError, InboundFrame, classify_frame, decode_frame};
pub use endpoint::resolve_endpoint;
pub use feed::{Feed, LiquidityFeed, MarketFeed};
pub use liveness::{DEFAULT_KEEPALIVE_INTERVAL, LivenessManager};
pub use session::{FeedSession, SessionConfig, UpdateHandler};
