//! Task id generation.
//!
//! Layout: `(unix_millis << 10) | session_tag`. The tag is drawn once per
//! generator, so two processes only collide if they share both the tag and
//! the millisecond. Within a generator ids are strictly increasing. The
//! result stays below 2^53 and survives a trip through JavaScript numbers.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::LazyLock;

const TAG_BITS: u32 = 10;
const TAG_MASK: i64 = (1 << TAG_BITS) - 1;
const STRIDE: i64 = 1 << TAG_BITS;

static GLOBAL: LazyLock<IdGenerator> = LazyLock::new(IdGenerator::new);

/// Next id from the process-wide generator.
pub fn generate_id() -> i64 {
    GLOBAL.next_id()
}

/// Monotonic id source tagged with a per-session random value.
#[derive(Debug)]
pub struct IdGenerator {
    tag: i64,
    last: AtomicI64,
}

impl IdGenerator {
    /// Generator with a random session tag.
    pub fn new() -> Self {
        Self::with_tag(rand::random::<u16>() as i64)
    }

    /// Generator with a fixed session tag (only the low 10 bits are used).
    pub fn with_tag(tag: i64) -> Self {
        Self {
            tag: tag & TAG_MASK,
            last: AtomicI64::new(0),
        }
    }

    pub fn session_tag(&self) -> i64 {
        self.tag
    }

    pub fn next_id(&self) -> i64 {
        let candidate = (chrono::Utc::now().timestamp_millis() << TAG_BITS) | self.tag;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = if candidate > prev { candidate } else { prev + STRIDE };
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
