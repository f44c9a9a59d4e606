mod admin;
mod all;
mod board;
mod footer;
mod header;
mod home;
mod items;
mod log;
mod main;
mod note;
mod popup;
mod whiteboard;
mod workspace;

use self::log::log;
use super::*;
use footer::footer;
use header::header;
use main::main;
use popup::popup;

pub use all::all as render;
