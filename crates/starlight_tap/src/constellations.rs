use bevy::math::Vec2;

/// Star positions are normalized to the sky, `(0, 0)` top left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constellation {
    pub name: &'static str,
    pub stars: &'static [Vec2],
}

impl Constellation {
    pub const fn star_count(&self) -> usize {
        self.stars.len()
    }

    pub fn star(&self, index: usize) -> Option<Vec2> {
        self.stars.get(index).copied()
    }
}

const fn star(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

pub static CONSTELLATIONS: [Constellation; 10] = [
    Constellation {
        name: "The Arrow",
        stars: &[star(0.5, 0.2), star(0.5, 0.5), star(0.5, 0.8)],
    },
    Constellation {
        name: "The Triangle",
        stars: &[star(0.5, 0.25), star(0.3, 0.6), star(0.7, 0.6)],
    },
    Constellation {
        name: "The Hook",
        stars: &[star(0.2, 0.3), star(0.5, 0.3), star(0.5, 0.6), star(0.8, 0.6)],
    },
    Constellation {
        name: "The Kite",
        stars: &[star(0.5, 0.15), star(0.3, 0.4), star(0.7, 0.4), star(0.5, 0.8)],
    },
    Constellation {
        name: "The Crown",
        stars: &[
            star(0.2, 0.4),
            star(0.35, 0.2),
            star(0.5, 0.3),
            star(0.65, 0.2),
            star(0.8, 0.4),
        ],
    },
    Constellation {
        name: "The Goblet",
        stars: &[
            star(0.3, 0.2),
            star(0.7, 0.2),
            star(0.3, 0.4),
            star(0.7, 0.4),
            star(0.5, 0.7),
        ],
    },
    Constellation {
        name: "The Serpent",
        stars: &[
            star(0.2, 0.2),
            star(0.4, 0.4),
            star(0.3, 0.6),
            star(0.5, 0.8),
            star(0.7, 0.7),
            star(0.8, 0.5),
        ],
    },
    Constellation {
        name: "The Big Dipper",
        stars: &[
            star(0.8, 0.2),
            star(0.65, 0.35),
            star(0.5, 0.3),
            star(0.35, 0.4),
            star(0.2, 0.6),
            star(0.4, 0.65),
            star(0.55, 0.5),
        ],
    },
    Constellation {
        name: "The Swan",
        stars: &[
            star(0.5, 0.1),
            star(0.5, 0.4),
            star(0.2, 0.3),
            star(0.8, 0.3),
            star(0.5, 0.7),
            star(0.4, 0.9),
            star(0.6, 0.9),
        ],
    },
    Constellation {
        name: "The Phoenix",
        stars: &[
            star(0.5, 0.1),
            star(0.4, 0.3),
            star(0.6, 0.3),
            star(0.5, 0.5),
            star(0.3, 0.7),
            star(0.7, 0.7),
            star(0.4, 0.9),
            star(0.6, 0.9),
        ],
    },
];
