pub mod burst_consts;
pub mod burst_framer;
pub mod cach;
pub mod events;
pub mod message_framer;
