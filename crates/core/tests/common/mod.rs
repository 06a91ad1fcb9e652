use flowviz_core::{Aabb, CellDataSet, FluentVelocityField, Vec3};

#[ctor::ctor]
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `n × n × n` voxel field over the unit cube; cell `(i, j, k)` holds the
/// velocity `(i, j, -k)`
#[allow(dead_code)]
pub fn graded_field(n: usize) -> FluentVelocityField {
    let mut ds = CellDataSet::voxel_grid(&Aabb::unit(), n, n, n);
    let mut x = Vec::with_capacity(n * n * n);
    let mut y = Vec::with_capacity(n * n * n);
    let mut z = Vec::with_capacity(n * n * n);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                x.push(i as f64);
                y.push(j as f64);
                z.push(-(k as f64));
            }
        }
    }
    ds.insert_cell_array("X_VELOCITY", x);
    ds.insert_cell_array("Y_VELOCITY", y);
    ds.insert_cell_array("Z_VELOCITY", z);
    FluentVelocityField::from_dataset(&ds).unwrap()
}

/// Velocity [`graded_field`] assigns to the cell containing `p`
#[allow(dead_code)]
pub fn graded_velocity(n: usize, p: &Vec3) -> Vec3 {
    let cell = |v: f32| ((v * n as f32).floor() as usize).min(n - 1) as f32;
    Vec3::new(cell(p.x), cell(p.y), -cell(p.z))
}
