use ndarray::{Array2, ArrayView4, Axis};
use serde::Serialize;

pub const NUM_LAYERS: usize = 32;
pub const NEAR_DEPTH: f32 = 1.0;
pub const FAR_DEPTH: f32 = 100.0;

/// Ordered layer depths, nearest first.
///
/// Depths are spaced linearly in disparity (inverse depth), which is the
/// convention the single-view MPI network was trained with. The first and
/// last entries are exactly `near` and `far`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DepthTable {
	depths: Vec<f32>,
}

impl DepthTable {
	pub fn new(near: f32, far: f32, count: usize) -> Self {
		debug_assert!(0.0 < near && near < far);
		debug_assert!(count >= 2);

		let near_disp = 1.0 / near;
		let far_disp = 1.0 / far;
		let last = (count - 1) as f32;

		let mut depths: Vec<f32> = (0..count)
			.map(|i| {
				let t = i as f32 / last;
				1.0 / (near_disp + (far_disp - near_disp) * t)
			})
			.collect();

		depths[0] = near;
		depths[count - 1] = far;

		Self { depths }
	}

	/// The table every image is processed with: 32 layers from 1.0 to 100.0.
	pub fn standard() -> Self {
		Self::new(NEAR_DEPTH, FAR_DEPTH, NUM_LAYERS)
	}

	pub fn len(&self) -> usize {
		self.depths.len()
	}

	pub fn is_empty(&self) -> bool {
		self.depths.is_empty()
	}

	pub fn as_slice(&self) -> &[f32] {
		&self.depths
	}

	pub fn disparities(&self) -> Vec<f32> {
		self.depths.iter().map(|d| 1.0 / d).collect()
	}
}

/// Collapse a layer stack `(L, H, W, 4)` into a disparity map `(H, W)`.
///
/// Each layer contributes its plane disparity weighted by its alpha, and is
/// occluded by every nearer layer. Compositing runs from the farthest layer to
/// the nearest with the usual "over" operator.
pub fn disparity_from_layers(layers: ArrayView4<f32>, depths: &DepthTable) -> Array2<f32> {
	debug_assert_eq!(layers.len_of(Axis(0)), depths.len());

	let (_, height, width, _) = layers.dim();
	let mut disparity = Array2::<f32>::zeros((height, width));

	for (layer, disp) in layers
		.axis_iter(Axis(0))
		.zip(depths.disparities())
		.rev()
	{
		let alpha = layer.index_axis(Axis(2), 3);
		disparity.zip_mut_with(&alpha, |acc, &a| {
			*acc = disp * a + *acc * (1.0 - a);
		});
	}

	disparity
}
