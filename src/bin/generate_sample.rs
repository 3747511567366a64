use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in [lo, hi].
    fn range_i64(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Neighborhoods with a base price level, loosely Ames-shaped.
const NEIGHBORHOODS: [(&str, f64); 8] = [
    ("NoRidge", 290_000.0),
    ("StoneBr", 270_000.0),
    ("NridgHt", 260_000.0),
    ("CollgCr", 200_000.0),
    ("Gilbert", 185_000.0),
    ("NAmes", 145_000.0),
    ("OldTown", 125_000.0),
    ("BrkSide", 120_000.0),
];

const ROWS: usize = 600;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let output_path = "data/train.csv";
    std::fs::create_dir_all("data").context("creating data directory")?;
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut header = vec![
        "Saleprice".to_string(),
        "YearBuilt".to_string(),
        "GrLivArea".to_string(),
        "OverallQual".to_string(),
        "LotArea".to_string(),
        "GarageArea".to_string(),
        "TotalBsmtSF".to_string(),
        "FullBath".to_string(),
    ];
    for (name, _) in NEIGHBORHOODS {
        header.push(format!("Neighborhood_{name}"));
    }
    writer.write_record(&header).context("writing header")?;

    for _ in 0..ROWS {
        let nb_idx = rng.range_i64(0, NEIGHBORHOODS.len() as i64 - 1) as usize;
        let (_, base_price) = NEIGHBORHOODS[nb_idx];

        let quality = rng.range_i64(3, 10);
        let year = rng.range_i64(1900, 2010);
        let area = (rng.gauss(1500.0, 450.0).max(500.0)) as i64;
        let lot = (rng.gauss(10_000.0, 3_000.0).max(2_000.0)) as i64;
        let garage = (rng.gauss(480.0, 180.0).max(0.0)) as i64;
        let basement = (rng.gauss(1_000.0, 350.0).max(0.0)) as i64;
        let baths = rng.range_i64(1, 3);

        // Price: neighborhood base, then area/quality/age effects + noise.
        let price = (base_price
            + 55.0 * area as f64
            + 14_000.0 * quality as f64
            + 320.0 * (year - 1900) as f64
            + rng.gauss(0.0, 18_000.0))
        .max(40_000.0) as i64;

        let mut record = vec![
            price.to_string(),
            year.to_string(),
            area.to_string(),
            quality.to_string(),
            lot.to_string(),
            garage.to_string(),
            basement.to_string(),
            baths.to_string(),
        ];
        for i in 0..NEIGHBORHOODS.len() {
            let hot = if i == nb_idx { "1" } else { "0" };
            record.push(hot.to_string());
        }
        writer.write_record(&record).context("writing row")?;
    }

    writer.flush().context("flushing CSV")?;
    println!("Wrote {ROWS} rows to {output_path}");
    Ok(())
}
