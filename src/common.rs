///////////////////// PRELUDE /////////////////////

pub(crate) use crate::collections::StringPool;

pub(crate) use core::fmt::{Debug, Formatter};
pub(crate) use maplit::hashmap;
pub(crate) use std::{io::Write, path::Path};
