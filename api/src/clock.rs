use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Decides which calendar day it is for every user, in one fixed zone.
#[derive(Clone)]
pub struct Calendar {
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl Calendar {
    pub fn new(timezone: Tz, clock: Arc<dyn Clock>) -> Self {
        Self { timezone, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.timezone).date_naive()
    }
}
