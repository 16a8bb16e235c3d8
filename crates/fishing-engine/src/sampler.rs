use std::fmt::Display;

use log::trace;
use rand::{seq::SliceRandom, Rng};

use crate::{
    catalog::{Catalog, Item},
    recency::RecencyWindow,
    score::{self, round_to, MEMBER_WEIGHT_KG},
    settings::Settings,
    UserId,
};

/// Weight multiplier for items found in the fisher's recency window.
pub const RECENT_DAMPENING: f64 = 0.5;

/// A server participant that can be reeled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: UserId,
    pub name: String,
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemCatch {
    pub name: String,
    pub rarity: String,
    pub size_cm: f64,
    pub weight_kg: f64,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberCatch {
    pub member: Member,
    pub weight_kg: f64,
    pub points: u32,
}

/// The result of one resolved fishing attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchOutcome {
    Item(ItemCatch),
    Member(MemberCatch),
    Nothing,
}

impl CatchOutcome {
    pub fn points(&self) -> u32 {
        match self {
            Self::Item(catch) => catch.points,
            Self::Member(catch) => catch.points,
            Self::Nothing => 0,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

impl Display for CatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item(catch) => write!(
                f,
                "{} ({} cm, {} kg) worth {} points",
                catch.name, catch.size_cm, catch.weight_kg, catch.points
            ),
            Self::Member(catch) => write!(
                f,
                "{} ({} kg) worth {} points",
                catch.member.name, catch.weight_kg, catch.points
            ),
            Self::Nothing => write!(f, "nothing"),
        }
    }
}

/// Draws one outcome for `fisher`.
///
/// The no-catch roll happens first, then the member roll, then the weighted
/// item draw. A member roll without eligible members falls through to an
/// item.
pub fn resolve<R: Rng + ?Sized>(
    settings: &Settings,
    recent: Option<&RecencyWindow>,
    fisher: UserId,
    members: &[Member],
    contest_active: bool,
    rng: &mut R,
) -> CatchOutcome {
    if rng.gen::<f64>() < settings.no_catch_chance {
        return CatchOutcome::Nothing;
    }

    if settings.member_catch_ratio > 0 && rng.gen_ratio(1, settings.member_catch_ratio) {
        if let Some(catch) = catch_member(members, fisher, contest_active, rng) {
            return CatchOutcome::Member(catch);
        }

        trace!("no member to catch for {fisher}, rolling for a fish instead");
    }

    let item = draw_item(&settings.catalog, recent, rng);
    let size_cm = round_to(item.size_cm.sample(rng), 1);
    let weight_kg = round_to(item.weight_kg.sample(rng), 2);

    CatchOutcome::Item(ItemCatch {
        name: item.name.clone(),
        rarity: item.rarity.clone(),
        size_cm,
        weight_kg,
        points: score::score(item, size_cm, weight_kg, contest_active),
    })
}

/// Reels in a random eligible member with a freshly rolled weight.
pub fn catch_member<R: Rng + ?Sized>(
    members: &[Member],
    fisher: UserId,
    contest_active: bool,
    rng: &mut R,
) -> Option<MemberCatch> {
    let member = pick_member(members, fisher, rng)?;
    let weight_kg = round_to(rng.gen_range(MEMBER_WEIGHT_KG), 1);

    Some(MemberCatch {
        member: member.clone(),
        weight_kg,
        points: score::with_contest_bonus(score::member_points(weight_kg), contest_active),
    })
}

/// A random member that is neither a bot nor the fisher.
pub fn pick_member<'a, R: Rng + ?Sized>(
    members: &'a [Member],
    fisher: UserId,
    rng: &mut R,
) -> Option<&'a Member> {
    let candidates: Vec<_> = members
        .iter()
        .filter(|member| !member.is_bot && member.id != fisher)
        .collect();

    candidates.choose(rng).copied()
}

/// Single weighted draw over the catalog, halving the weight of recent catches.
pub fn draw_item<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    recent: Option<&RecencyWindow>,
    rng: &mut R,
) -> &'a Item {
    catalog
        .items()
        .choose_weighted(rng, |item| effective_weight(catalog, item, recent))
        .expect("catalog is validated to be non-empty with positive weights")
}

pub fn effective_weight(catalog: &Catalog, item: &Item, recent: Option<&RecencyWindow>) -> f64 {
    let weight = catalog.base_weight(item);

    if recent.map_or(false, |window| window.contains(&item.name)) {
        weight * RECENT_DAMPENING
    } else {
        weight
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Duration;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::catalog::tests::{item, rarities};

    fn settings(items: Vec<Item>, no_catch_chance: f64, member_catch_ratio: u32) -> Settings {
        Settings {
            catalog: Catalog::new(items, rarities()).unwrap(),
            no_catch_chance,
            member_catch_ratio,
            cooldown: Duration::seconds(30),
            contest_countdown: Duration::seconds(60),
        }
    }

    fn member(id: UserId, is_bot: bool) -> Member {
        Member {
            id,
            name: format!("member {id}"),
            is_bot,
        }
    }

    #[test]
    fn certain_no_catch_ignores_catalog() {
        let settings = settings(vec![item("Bass", "common")], 1.0, 1);
        let mut rng = StdRng::seed_from_u64(1);
        let members = [member(2, false)];

        for _ in 0..1_000 {
            let outcome = resolve(&settings, None, 1, &members, false, &mut rng);
            assert_eq!(outcome, CatchOutcome::Nothing);
        }
    }

    #[test]
    fn certain_member_catch() {
        let settings = settings(vec![item("Bass", "common")], 0.0, 1);
        let mut rng = StdRng::seed_from_u64(2);
        let members = [member(1, false), member(2, true), member(3, false)];

        for _ in 0..1_000 {
            match resolve(&settings, None, 1, &members, false, &mut rng) {
                CatchOutcome::Member(catch) => {
                    assert_eq!(catch.member.id, 3);
                    assert!(MEMBER_WEIGHT_KG.contains(&catch.weight_kg));
                    assert_eq!(catch.points, score::member_points(catch.weight_kg));
                }
                other => panic!("expected a member catch, got {other:?}"),
            }
        }
    }

    #[test]
    fn member_catch_during_contest_gets_bonus() {
        let settings = settings(vec![item("Bass", "common")], 0.0, 1);
        let mut rng = StdRng::seed_from_u64(3);

        match resolve(&settings, None, 1, &[member(2, false)], true, &mut rng) {
            CatchOutcome::Member(catch) => assert_eq!(
                catch.points,
                score::with_contest_bonus(score::member_points(catch.weight_kg), true)
            ),
            other => panic!("expected a member catch, got {other:?}"),
        }
    }

    #[test]
    fn member_roll_without_candidates_falls_back_to_item() {
        let settings = settings(vec![item("Bass", "common")], 0.0, 1);
        let mut rng = StdRng::seed_from_u64(4);
        let members = [member(1, false), member(2, true)];

        for _ in 0..100 {
            let outcome = resolve(&settings, None, 1, &members, false, &mut rng);
            assert!(matches!(outcome, CatchOutcome::Item(ref catch) if catch.name == "Bass"));
        }
    }

    #[test]
    fn catch_member_needs_a_candidate() {
        let mut rng = StdRng::seed_from_u64(8);

        assert_eq!(catch_member(&[member(1, false)], 1, false, &mut rng), None);

        let catch = catch_member(&[member(1, false), member(2, false)], 1, false, &mut rng).unwrap();
        assert_eq!(catch.member.id, 2);
        assert_eq!(catch.weight_kg, round_to(catch.weight_kg, 1));
    }

    #[test]
    fn sampled_attributes_stay_in_range() {
        let settings = settings(vec![item("Bass", "common")], 0.0, 0);
        let mut rng = StdRng::seed_from_u64(5);
        let bass = settings.catalog.items()[0].clone();

        for _ in 0..1_000 {
            let CatchOutcome::Item(catch) = resolve(&settings, None, 1, &[], false, &mut rng) else {
                panic!("expected an item");
            };
            assert!(bass.size_cm.contains(catch.size_cm));
            assert!(bass.weight_kg.contains(catch.weight_kg));
            assert!(catch.points <= 2 * bass.theoretical_max());
        }
    }

    #[test]
    fn rarer_tiers_are_drawn_less_often() {
        let catalog = Catalog::new(
            vec![
                item("Pike", "legendary"),
                item("Trout", "rare"),
                item("Bass", "common"),
            ],
            rarities(),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(6);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for _ in 0..100_000 {
            *counts
                .entry(draw_item(&catalog, None, &mut rng).name.as_str())
                .or_default() += 1;
        }

        assert!(counts["Pike"] < counts["Trout"]);
        assert!(counts["Trout"] < counts["Bass"]);
    }

    #[test]
    fn recent_catches_are_dampened_not_excluded() {
        let catalog = Catalog::new(
            vec![item("Bass", "common"), item("Perch", "common")],
            rarities(),
        )
        .unwrap();
        let mut window = RecencyWindow::default();
        window.push("Bass");
        let mut rng = StdRng::seed_from_u64(7);

        let bass = &catalog.items()[0];
        assert_eq!(
            effective_weight(&catalog, bass, Some(&window)),
            catalog.base_weight(bass) * RECENT_DAMPENING
        );

        let drawn = (0..30_000)
            .filter(|_| draw_item(&catalog, Some(&window), &mut rng).name == "Bass")
            .count();

        // expected share is one third
        assert!(drawn > 9_000, "bass drawn {drawn} times");
        assert!(drawn < 11_000, "bass drawn {drawn} times");
    }
}
