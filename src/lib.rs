//! vision-bridge: a sensor-to-actuator bridge.
//!
//! Accepts a stream of compressed camera frames over one TCP connection,
//! classifies each frame for the presence of a significant red region, and
//! answers every frame with one of two motion commands: `movered` when red
//! is visible, `idle` when not.
//!
//! Data flows one direction per cycle: bytes in (frame), pixel grid,
//! boolean, bytes out (command). Control flow is synchronous and
//! sequential; one frame is fully processed before the next is read.
//!
//! # Module Structure
//!
//! - `protocol`: length-prefixed wire framing and the command vocabulary
//! - `codec`: compressed payload to pixel grid
//! - `detect`: fixed red colour-segmentation heuristic
//! - `session`: per-connection request/response loop
//! - `server`: sequential TCP listener
//! - `viz`: swappable debug sinks
//! - `config`: process configuration (file, env, defaults)

pub mod codec;
pub mod config;
pub mod detect;
pub mod frame;
pub mod protocol;
pub mod server;
pub mod session;
pub mod viz;

pub use codec::{decode_frame, DecodeError};
pub use config::Config;
pub use detect::{Detection, RedDetector};
pub use frame::{Frame, Mask};
pub use protocol::{read_message, write_message, Command, ProtocolError};
pub use server::{ServerHandle, VisionServer};
pub use session::{run_session, SessionError};
pub use viz::{NullVisualizer, SnapshotVisualizer, Visualizer};
