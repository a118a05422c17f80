pub mod poll_mode;
