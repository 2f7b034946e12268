use rand::Rng;

static ADJECTIVES: &[&str] = &[
    "amber", "bold", "brisk", "calm", "clever", "crimson", "daring", "dusty", "eager", "fabled",
    "gilded", "hidden", "ivory", "jolly", "keen", "lucky", "mellow", "nimble", "olive", "proud",
    "quiet", "rustic", "silent", "swift", "tidy", "velvet", "wild", "zesty",
];

static NOUNS: &[&str] = &[
    "anchor", "badger", "beacon", "canyon", "comet", "falcon", "garden", "harbor", "island",
    "jester", "lantern", "meadow", "nettle", "orchard", "panther", "quarry", "raven", "saddle",
    "thicket", "umbrella", "valley", "walrus", "yarrow", "zephyr",
];

/// Generate a human-readable deck name: one adjective and one noun drawn
/// uniformly from the fixed word lists, joined by a space.
pub fn random_deck_name(rng: &mut impl Rng) -> String {
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    format!("{adjective} {noun}")
}
