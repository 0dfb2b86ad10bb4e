use poimap::spatial::single_linkage;
use poimap::Point;
use proptest::prelude::*;

fn points() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(
        (0.0f64..500.0, 0.0f64..500.0).prop_map(|(x, y)| Point::new(x, y)),
        0..60,
    )
}

proptest! {
    #[test]
    fn groups_partition_the_input(points in points(), distance in 1.0f64..120.0) {
        let groups = single_linkage(&points, distance);

        let mut seen = vec![0usize; points.len()];
        for group in &groups {
            prop_assert!(!group.is_empty());
            for &i in group {
                seen[i] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn close_pairs_share_a_group(points in points(), distance in 1.0f64..120.0) {
        let groups = single_linkage(&points, distance);
        let mut owner = vec![usize::MAX; points.len()];
        for (g, group) in groups.iter().enumerate() {
            for &i in group {
                owner[i] = g;
            }
        }

        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if points[i].distance_to(&points[j]) < distance {
                    prop_assert_eq!(owner[i], owner[j]);
                }
            }
        }
    }

    #[test]
    fn every_member_has_a_close_neighbour(points in points(), distance in 1.0f64..120.0) {
        for group in single_linkage(&points, distance) {
            if group.len() < 2 {
                continue;
            }
            for &i in &group {
                let linked = group
                    .iter()
                    .any(|&j| j != i && points[i].distance_to(&points[j]) < distance);
                prop_assert!(linked);
            }
        }
    }

    #[test]
    fn groups_follow_input_order(points in points(), distance in 1.0f64..120.0) {
        let groups = single_linkage(&points, distance);
        for group in &groups {
            prop_assert!(group.windows(2).all(|w| w[0] < w[1]));
        }
        let firsts: Vec<usize> = groups.iter().map(|g| g[0]).collect();
        prop_assert!(firsts.windows(2).all(|w| w[0] < w[1]));
    }
}
