//! Writes `sample_captures.parquet`: a sequence of synthetic 2.4 GHz band
//! sweeps with a few fixed carriers, one drifting carrier and an occasional
//! burst, so Max/Min hold and the marker searches have something to show.

use std::sync::Arc;

use arrow::array::{Float64Array, Float64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const FSTART: f64 = 2.400e9;
const FSTOP: f64 = 2.480e9;
const POINTS: usize = 1024;
const CAPTURES: usize = 120;
const NOISE_FLOOR_DBM: f64 = -98.0;

/// A carrier: centre frequency (Hz), width (Hz), peak power (dBm).
type Carrier = (f64, f64, f64);

/// Power in dBm of `carriers` over the noise floor at `freq`.
fn sweep_power(freq: f64, carriers: &[Carrier], rng: &mut SimpleRng) -> f64 {
    let noise_mw = 10f64.powf((NOISE_FLOOR_DBM + rng.gauss(0.0, 2.0)) / 10.0);
    let signal_mw: f64 = carriers
        .iter()
        .map(|&(fc, width, dbm)| {
            let shape = (-(freq - fc).powi(2) / (2.0 * width.powi(2))).exp();
            10f64.powf(dbm / 10.0) * shape
        })
        .sum();
    10.0 * (noise_mw + signal_mw).log10()
}

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let step = (FSTOP - FSTART) / (POINTS - 1) as f64;
    let freqs: Vec<f64> = (0..POINTS).map(|i| FSTART + step * i as f64).collect();

    let fixed: [Carrier; 3] = [
        (2.412e9, 2.0e6, -45.0),
        (2.437e9, 2.0e6, -60.0),
        (2.462e9, 2.0e6, -52.0),
    ];

    let mut power_builder = ListBuilder::new(Float64Builder::new());
    for n in 0..CAPTURES {
        let mut carriers = fixed.to_vec();
        // Slow drift across the lower half of the band.
        let drift = 2.402e9 + (n as f64 / CAPTURES as f64) * 0.035e9;
        carriers.push((drift, 0.3e6, -70.0));
        // Short burst every 17th sweep.
        if n % 17 == 0 {
            carriers.push((2.471e9, 1.0e6, -40.0));
        }

        let values = power_builder.values();
        for &f in &freqs {
            values.append_value(sweep_power(f, &carriers, &mut rng));
        }
        power_builder.append(true);
    }
    let power_array = power_builder.finish();

    let schema = Arc::new(Schema::new(vec![
        Field::new("fstart", DataType::Float64, false),
        Field::new("fstop", DataType::Float64, false),
        Field::new(
            "power",
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        ),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(vec![FSTART; CAPTURES])),
            Arc::new(Float64Array::from(vec![FSTOP; CAPTURES])),
            Arc::new(power_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "sample_captures.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {CAPTURES} captures ({POINTS} points each) to {output_path}");
}
