//! Empty node: the identity of composition.

use std::any::Any;

use async_trait::async_trait;

use crate::error::Error;
use crate::tree::node::{Lifecycle, Value};
use crate::tree::signal::Signal;

pub(crate) struct Empty;

#[async_trait]
impl Lifecycle for Empty {
    fn err(&self) -> Option<Error> {
        None
    }

    async fn wait(&self) {}

    fn ready(&self) -> Signal {
        Signal::fired()
    }

    fn value(&self, _key: &dyn Any) -> Option<Value> {
        None
    }

    async fn close(&self) {}

    fn finished(&self) -> Signal {
        Signal::fired()
    }

    fn has_counters(&self) -> bool {
        false
    }

    fn cause(&self) -> Option<Error> {
        None
    }
}
