use super::entity::Review;
use rust_decimal::Decimal;

const RATING_SCALE: u32 = 2;

/// Mean rating rounded to two decimals, half away from zero.
///
/// Computed in integer hundredths so the rounding is exact. An empty set
/// averages to zero.
pub fn average_rating<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Decimal {
    let (sum, count) = reviews
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), review| {
            (sum + i64::from(review.rating), count + 1)
        });

    if count == 0 {
        return Decimal::new(0, RATING_SCALE);
    }

    let scaled = sum * 100;
    let mut hundredths = scaled / count;
    if (scaled % count).abs() * 2 >= count {
        hundredths += scaled.signum();
    }
    Decimal::new(hundredths, RATING_SCALE)
}
