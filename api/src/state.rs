use std::sync::Arc;

use crate::clock::Calendar;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub calendar: Calendar,
}
