use chrono::{Days, NaiveDate};

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn write_construction(rng: &mut SimpleRng) -> usize {
    let techs = ["Alice", "Bob", "Carlos", "Dee"];
    let descriptions = [
        "Strand install on Route 9",
        "Pulled Fiber($0.02) 2k ft",
        "Lashed cable between poles 14-22",
        "Site cleanup and inventory",
        "Strand tensioning, Lashed tail section",
    ];
    let projects = ["Project North", "Project South", "Labor"];
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let mut writer = csv::Writer::from_path("construction.csv").expect("create construction.csv");
    writer
        .write_record([
            "Date",
            "Who filled this out?",
            "What did you do.",
            "Project or labor?",
        ])
        .expect("write header");

    let rows = 120;
    for _ in 0..rows {
        let date = start + Days::new(rng.next_u64() % 90);
        writer
            .write_record([
                date.format("%Y-%m-%d").to_string(),
                rng.pick(&techs).to_string(),
                rng.pick(&descriptions).to_string(),
                rng.pick(&projects).to_string(),
            ])
            .expect("write row");
    }
    writer.flush().expect("flush construction.csv");
    rows
}

fn write_talley(rng: &mut SimpleRng) -> usize {
    let employees = ["Evan", "Fran", "Gus"];
    let categories = ["Internet", "Voice", "Video"];
    let statuses = ["Open", "Closed", "Pending"];
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let mut writer = csv::Writer::from_path("talley.csv").expect("create talley.csv");
    writer
        .write_record(["Date", "Employee", "MRC", "Category", "Status", "Reason"])
        .expect("write header");

    let rows = 80;
    for i in 0..rows {
        let date = start + Days::new(rng.next_u64() % 90);
        // A few unparseable MRC cells to exercise the null-on-failure path.
        let mrc = if i % 17 == 0 {
            "pending".to_string()
        } else {
            format!("{:.2}", 40.0 + rng.next_f64() * 160.0)
        };
        writer
            .write_record([
                date.format("%Y-%m-%d").to_string(),
                rng.pick(&employees).to_string(),
                mrc,
                rng.pick(&categories).to_string(),
                rng.pick(&statuses).to_string(),
                String::new(),
            ])
            .expect("write row");
    }
    writer.flush().expect("flush talley.csv");
    rows
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let construction_rows = write_construction(&mut rng);
    let talley_rows = write_talley(&mut rng);
    println!(
        "Wrote {construction_rows} rows to construction.csv and {talley_rows} rows to talley.csv"
    );
}
