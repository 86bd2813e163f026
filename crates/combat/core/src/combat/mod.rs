//! Damage resolution.
//!
//! Pure functions turning two combatants' stats into an attack result. The
//! only input besides stats is the random source, which callers inject so
//! fights can be replayed from a seed.
//!
//! - `resolve_attack`: hit roll, crit roll, then damage
//! - `check_hit` / `check_crit`: probability rolls
//! - `calculate_damage`: attack minus defense with multiplier and crit bonus

pub mod damage;
pub mod hit;
pub mod result;

pub use damage::{DamageKind, calculate_damage};
pub use hit::{check_crit, check_hit};
pub use result::{AttackResult, resolve_attack};
