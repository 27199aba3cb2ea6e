mod helpers;
mod payload;
