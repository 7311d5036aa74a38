//! Rating → ordered target class
//!
//! Fixed breakpoints taken from the corpus rating distribution. Buckets are
//! left-inclusive and right-exclusive, except the last which is closed:
//!
//! | class | range |
//! |---|---|
//! | 0 | [0, 2.77) |
//! | 1 | [2.77, 3.17) |
//! | 2 | [3.17, 3.35) |
//! | 3 | [3.35, 3.52) |
//! | 4 | [3.52, 3.73) |
//! | 5 | [3.73, 5.0] |

/// Lower bounds of classes 1..=5
pub const BREAKPOINTS: [f64; 5] = [2.77, 3.17, 3.35, 3.52, 3.73];

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Number of target classes
pub const CLASS_COUNT: u8 = 6;

/// Class of `rating`, `None` for NaN or values outside [0, 5]
pub fn discretize(rating: f64) -> Option<u8> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return None;
    }
    let class = BREAKPOINTS.iter().take_while(|bp| rating >= **bp).count();
    Some(class as u8)
}
