mod sync;
mod time;
