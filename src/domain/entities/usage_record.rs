/// Free-tier standing of a user, as shown on the dashboard counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSummary {
    pub count: i64,
    pub free_limit: i64,
    pub is_pro: bool,
}

impl UsageSummary {
    pub fn remaining(&self) -> i64 {
        if self.is_pro {
            return self.free_limit;
        }
        (self.free_limit - self.count).max(0)
    }
}
