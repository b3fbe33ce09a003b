//! Saber-on-saber collision.

use contracts::SaberSegment;

/// Player one's tip has crossed past player two's tip horizontally and sits
/// strictly between the two endpoint heights of player two's blade.
pub fn sabers_clash(saber1: &SaberSegment, saber2: &SaberSegment) -> bool {
    let tip = saber1.tip;
    let (low, high) = if saber2.hilt.y <= saber2.tip.y {
        (saber2.hilt.y, saber2.tip.y)
    } else {
        (saber2.tip.y, saber2.hilt.y)
    };

    tip.x > saber2.tip.x && tip.y > low && tip.y < high
}
