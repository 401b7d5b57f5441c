mod common;
mod velero;
