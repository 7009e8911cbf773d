mod common;
mod extraction;
mod routing;
mod shortlist;
