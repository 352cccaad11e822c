//! Hit rule for Around-the-Clock.

use crate::engine::dart::{Dart, Multiplier, BULL};

use super::types::ClockConfig;

/// Whether `dart` counts as hitting `target` under the configured ring rules.
///
/// | doubles | triples | counts                                  |
/// |---------|---------|-----------------------------------------|
/// | off     | off     | single, or bull single/double           |
/// | on      | off     | single or double                        |
/// | off     | on      | single or triple                        |
/// | on      | on      | any ring                                |
pub fn is_hit(config: &ClockConfig, target: u8, dart: &Dart) -> bool {
    let Dart::Hit { segment, multiplier } = *dart else {
        return false;
    };
    if segment != target {
        return false;
    }
    match (config.include_doubles, config.include_triples) {
        (false, false) => {
            multiplier == Multiplier::Single
                || (segment == BULL && matches!(multiplier, Multiplier::Single | Multiplier::Double))
        }
        (true, false) => matches!(multiplier, Multiplier::Single | Multiplier::Double),
        (false, true) => matches!(multiplier, Multiplier::Single | Multiplier::Triple),
        (true, true) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(doubles: bool, triples: bool) -> ClockConfig {
        ClockConfig {
            include_bull: true,
            include_doubles: doubles,
            include_triples: triples,
        }
    }

    #[test]
    fn test_hit_table() {
        // (doubles, triples) -> expected for [single, double, triple] on 7
        let table = [
            ((false, false), [true, false, false]),
            ((true, false), [true, true, false]),
            ((false, true), [true, false, true]),
            ((true, true), [true, true, true]),
        ];
        for ((doubles, triples), expected) in table {
            let cfg = config(doubles, triples);
            let got = [
                is_hit(&cfg, 7, &Dart::single(7)),
                is_hit(&cfg, 7, &Dart::double(7)),
                is_hit(&cfg, 7, &Dart::triple(7)),
            ];
            assert_eq!(got, expected, "doubles={doubles} triples={triples}");
        }
    }

    #[test]
    fn test_bull_rows() {
        assert!(is_hit(&config(false, false), BULL, &Dart::double(BULL)));
        assert!(is_hit(&config(false, false), BULL, &Dart::single(BULL)));
        assert!(is_hit(&config(true, false), BULL, &Dart::double(BULL)));
        assert!(!is_hit(&config(false, true), BULL, &Dart::double(BULL)));
        assert!(is_hit(&config(true, true), BULL, &Dart::double(BULL)));
    }

    #[test]
    fn test_wrong_segment_and_miss() {
        let cfg = config(true, true);
        assert!(!is_hit(&cfg, 7, &Dart::single(8)));
        assert!(!is_hit(&cfg, 7, &Dart::Miss));
    }
}
