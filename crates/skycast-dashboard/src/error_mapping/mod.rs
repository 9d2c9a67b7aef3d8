//! Maps dashboard errors to skycast_core::AppError so every failure gets a
//! classified kind and a user-facing message.

mod weather;
