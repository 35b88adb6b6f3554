mod helpers;
mod interests;
mod mocks;
mod stats;
