use super::*;
use crate::def::*;

use interpolate_name::interpolate_test;
use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

fn setup_config(
    w: usize,
    h: usize,
    bit_depth: usize,
    chroma_sampling: ChromaSampling,
    feature_mask: u8,
    cpu_feature_level: Option<CpuFeatureLevel>,
) -> SaoConfig {
    SaoConfig {
        width: w,
        height: h,
        bit_depth,
        chroma_sampling,
        feature_mask,
        lambda: 1.0,
        cpu_feature_level,
    }
}

fn setup_context<T: Pixel>(cfg: &SaoConfig) -> Context<T> {
    Context::init(cfg, SaoSbacCtx::default()).unwrap()
}

fn fill_plane<T: Pixel>(p: &mut Plane<T>, f: impl Fn(usize, usize) -> u32) {
    for y in 0..p.cfg.height {
        for (x, v) in p.row_mut(y).iter_mut().enumerate() {
            *v = T::cast_from(f(x, y));
        }
    }
}

fn plane_rows<T: Pixel>(p: &Plane<T>) -> Vec<Vec<T>> {
    p.rows_iter().map(|r| r.to_vec()).collect()
}

fn frame_rows<T: Pixel>(f: &Frame<T>) -> Vec<Vec<Vec<T>>> {
    f.planes.iter().map(plane_rows).collect()
}

/* textured source and a reconstruction with small coding noise */
fn noisy_pair<T: Pixel>(
    w: usize,
    h: usize,
    cs: ChromaSampling,
    bit_depth: usize,
    seed: u8,
) -> (Frame<T>, Frame<T>) {
    let max = (1i32 << bit_depth) - 1;
    let mut ra = ChaChaRng::from_seed([seed; 32]);
    let mut orig = Frame::<T>::new(w, h, cs);
    let mut rec = Frame::<T>::new(w, h, cs);
    for c in 0..N_C {
        let (pw, ph) = (orig.planes[c].cfg.width, orig.planes[c].cfg.height);
        for y in 0..ph {
            for x in 0..pw {
                let base = ((x * 5 + y * 3) as i32 * (max + 1) / 512) % (max + 1);
                let o = (base + ra.gen_range(-8, 9)).max(0).min(max);
                let r = (o + ra.gen_range(-6, 7)).max(0).min(max);
                orig.planes[c].row_mut(y)[x] = T::cast_from(o);
                rec.planes[c].row_mut(y)[x] = T::cast_from(r);
            }
        }
    }
    (orig, rec)
}

fn records<T: Pixel>(ctx: &Context<T>, group: SaoGroup) -> Vec<SaoParams> {
    let mut out = Vec::new();
    for cy in 0..ctx.ctu_rows() {
        for cx in 0..ctx.ctu_cols() {
            if let Some(p) = ctx.params(cx, cy, group) {
                out.push(*p);
            }
        }
    }
    out
}

#[test]
fn band_offset_on_zero_block() {
    let cfg = setup_config(8, 8, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let params = SaoParams {
        mode: SaoMode::Band {
            position: [0, 0],
            offsets: [[3, 0, 0, 0], [0; 4]],
        },
        ..Default::default()
    };
    ctx.set_params(0, 0, SaoGroup::Luma, params).unwrap();
    assert_eq!(ctx.params(0, 0, SaoGroup::Luma).unwrap().offsets()[..5], [0, 3, 0, 0, 0]);

    let mut src = Plane::<u8>::new(8, 8, 0, 0, 0, 0);
    fill_plane(&mut src, |_, _| 0);
    let mut dst = src.clone();
    ctx.reconstruct_ctu(0, 0, Y_C, &src, &mut dst);
    assert_eq!(plane_rows(&dst), vec![vec![3u8; 8]; 8]);

    // the rest of the first band moves by the same offset
    fill_plane(&mut src, |x, _| x as u32);
    ctx.reconstruct_ctu(0, 0, Y_C, &src, &mut dst);
    assert_eq!(dst.row(0), &[3, 4, 5, 6, 7, 8, 9, 10]);
}

#[test]
fn monotone_ramp_is_untouched() {
    let cfg = setup_config(8, 8, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let params = SaoParams {
        mode: SaoMode::Edge {
            class: EdgeClass::EO0,
            offsets: [[2, 1, -1, -2], [0; 4]],
        },
        ..Default::default()
    };
    ctx.set_params(0, 0, SaoGroup::Luma, params).unwrap();

    let mut src = Plane::<u8>::new(8, 8, 0, 0, 0, 0);
    fill_plane(&mut src, |x, _| 8 * x as u32);
    let mut dst = Plane::<u8>::new(8, 8, 0, 0, 0, 0);
    ctx.reconstruct_ctu(0, 0, Y_C, &src, &mut dst);
    // a < c < b is category 0, so no sample moves
    assert_eq!(plane_rows(&dst), plane_rows(&src));
}

/* horizontal +/-3 ripple inside one band over a flat source */
fn ripple_pair(w: usize, h: usize) -> (Frame<u8>, Frame<u8>) {
    let mut orig = Frame::<u8>::new(w, h, ChromaSampling::Cs400);
    let mut rec = Frame::<u8>::new(w, h, ChromaSampling::Cs400);
    fill_plane(&mut orig.planes[Y_C], |_, _| 100);
    fill_plane(&mut rec.planes[Y_C], |x, _| if x % 2 == 0 { 97 } else { 103 });
    (orig, rec)
}

#[test]
fn identical_neighbor_merges_left() {
    let cfg = setup_config(128, 64, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (orig, rec) = ripple_pair(128, 64);

    ctx.search_frame(&orig, &rec);
    let left = *ctx.params(0, 0, SaoGroup::Luma).unwrap();
    let right = *ctx.params(1, 0, SaoGroup::Luma).unwrap();

    assert_eq!(
        left.mode,
        SaoMode::Edge {
            class: EdgeClass::EO0,
            offsets: [[3, 0, 0, -2], [0; 4]],
        }
    );
    assert!(left.distortion < 0);
    assert_eq!(right.merge, SaoMerge::Left);
    assert!(right.merge_left() && !right.merge_up());
    assert_eq!(right.without_merge(), left);
    assert_eq!(right.offsets(), left.offsets());
}

#[test]
fn merged_record_copies_neighbor_distortion() {
    let cfg = setup_config(128, 64, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (mut orig, rec) = ripple_pair(128, 64);
    // right CTU differs from the left one on a sparse diagonal
    fill_plane(&mut orig.planes[Y_C], |x, y| {
        if x >= 64 && (x + y) % 7 == 0 {
            101
        } else {
            100
        }
    });

    ctx.search_frame(&orig, &rec);
    let left = *ctx.params(0, 0, SaoGroup::Luma).unwrap();
    let right = *ctx.params(1, 0, SaoGroup::Luma).unwrap();

    assert_eq!(right.merge, SaoMerge::Left);
    assert_eq!(right.distortion, left.distortion);
    assert_eq!(right.without_merge(), left);
}

#[test]
fn merge_stops_at_region_border() {
    let cfg = setup_config(128, 64, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (orig, rec) = ripple_pair(128, 64);

    assert!(ctx.set_region_ids(vec![0, 1, 2]).is_err());
    ctx.set_region_ids(vec![0, 1]).unwrap();
    ctx.search_frame(&orig, &rec);

    let left = *ctx.params(0, 0, SaoGroup::Luma).unwrap();
    let right = *ctx.params(1, 0, SaoGroup::Luma).unwrap();
    assert_eq!(right.merge, SaoMerge::None);
    assert_eq!(right.mode, left.mode);
}

#[test]
fn vertical_neighbor_merges_up() {
    let cfg = setup_config(64, 128, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (orig, rec) = ripple_pair(64, 128);

    ctx.search_frame(&orig, &rec);
    let top = *ctx.params(0, 0, SaoGroup::Luma).unwrap();
    let bottom = *ctx.params(0, 1, SaoGroup::Luma).unwrap();
    assert_eq!(bottom.merge, SaoMerge::Up);
    assert_eq!(bottom.without_merge(), top);
}

#[test]
fn concave_offsets_never_negative() {
    // local minima of rec that the source wants even darker
    let cfg = setup_config(64, 64, 8, ChromaSampling::Cs400, SAO_FEATURE_EDGE, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let mut orig = Frame::<u8>::new(64, 64, ChromaSampling::Cs400);
    let mut rec = Frame::<u8>::new(64, 64, ChromaSampling::Cs400);
    fill_plane(&mut rec.planes[Y_C], |x, y| if (x + y) % 2 == 0 { 100 } else { 120 });
    fill_plane(&mut orig.planes[Y_C], |x, y| if (x + y) % 2 == 0 { 94 } else { 120 });

    ctx.search_ctu(0, 0, &orig, &rec);
    let p = ctx.params(0, 0, SaoGroup::Luma).unwrap();
    assert!(p.is_valid(8));
    let o = p.offsets();
    assert!(o[1] >= 0 && o[2] >= 0);
    assert!(o[3] <= 0 && o[4] <= 0);
}

#[test]
fn band_only_chroma_is_never_edge() {
    let cfg = setup_config(64, 64, 8, ChromaSampling::Cs420, SAO_FEATURE_BAND, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let mut ra = ChaChaRng::from_seed([5; 32]);
    let mut orig = Frame::<u8>::new(64, 64, ChromaSampling::Cs420);
    let mut rec = Frame::<u8>::new(64, 64, ChromaSampling::Cs420);
    for c in 0..N_C {
        fill_plane(&mut orig.planes[c], |_, _| 128);
        for y in 0..rec.planes[c].cfg.height {
            for v in rec.planes[c].row_mut(y).iter_mut() {
                *v = (128 + ra.gen_range(-5i32, 6)) as u8;
            }
        }
    }

    ctx.search_ctu(0, 0, &orig, &rec);
    for group in [SaoGroup::Luma, SaoGroup::Chroma].iter() {
        let p = ctx.params(0, 0, *group).unwrap();
        assert!(
            p.kind() == SaoKind::None || p.kind() == SaoKind::Band,
            "{} picked {}",
            group,
            p.kind()
        );
        assert!(p.is_valid(8));
    }
}

#[test]
fn disabled_search_writes_none() {
    let cfg = setup_config(64, 64, 8, ChromaSampling::Cs400, 0, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (orig, rec) = ripple_pair(64, 64);
    ctx.set_params(
        0,
        0,
        SaoGroup::Luma,
        SaoParams {
            mode: SaoMode::Band {
                position: [3, 0],
                offsets: [[1, 1, 1, 1], [0; 4]],
            },
            ..Default::default()
        },
    )
    .unwrap();

    ctx.search_ctu(0, 0, &orig, &rec);
    assert_eq!(*ctx.params(0, 0, SaoGroup::Luma).unwrap(), SaoParams::default());
    assert_eq!(ctx.params(0, 0, SaoGroup::Chroma), None);
}

#[test]
fn none_is_a_copy() {
    let cfg = setup_config(100, 70, 8, ChromaSampling::Cs420, SAO_FEATURE_ALL, None);
    let ctx = setup_context::<u8>(&cfg);
    let (src, _) = noisy_pair::<u8>(100, 70, ChromaSampling::Cs420, 8, 7);
    let mut dst = Frame::<u8>::new(100, 70, ChromaSampling::Cs420);
    for c in 0..N_C {
        fill_plane(&mut dst.planes[c], |_, _| 3);
    }
    ctx.reconstruct_frame(&src, &mut dst);
    assert_eq!(frame_rows(&dst), frame_rows(&src));
}

#[test]
fn reconstruct_is_deterministic() {
    let cfg = setup_config(150, 90, 8, ChromaSampling::Cs420, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (orig, rec) = noisy_pair::<u8>(150, 90, ChromaSampling::Cs420, 8, 11);
    ctx.search_frame(&orig, &rec);

    let mut a = Frame::<u8>::new(150, 90, ChromaSampling::Cs420);
    let mut b = Frame::<u8>::new(150, 90, ChromaSampling::Cs420);
    ctx.reconstruct_frame(&rec, &mut a);
    ctx.reconstruct_frame(&rec, &mut b);
    assert_eq!(frame_rows(&a), frame_rows(&b));
}

#[test]
fn single_sample_frame_is_unchanged() {
    let cfg = setup_config(1, 1, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let mut src = Plane::<u8>::new(1, 1, 0, 0, 0, 0);
    fill_plane(&mut src, |_, _| 77);
    for class in EdgeClass::all().iter().copied() {
        ctx.set_params(
            0,
            0,
            SaoGroup::Luma,
            SaoParams {
                mode: SaoMode::Edge {
                    class,
                    offsets: [[7, 7, -7, -7], [0; 4]],
                },
                ..Default::default()
            },
        )
        .unwrap();
        let mut dst = Plane::<u8>::new(1, 1, 0, 0, 0, 0);
        ctx.reconstruct_ctu(0, 0, Y_C, &src, &mut dst);
        assert_eq!(dst.p(0, 0), 77, "{}", class);
    }
}

#[test]
fn corner_samples_are_unchanged() {
    let cfg = setup_config(64, 64, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let mut src = Plane::<u8>::new(64, 64, 0, 0, 0, 0);
    // column stripes: every sample is an extremum along both diagonals
    fill_plane(&mut src, |x, _| if x % 2 == 0 { 50 } else { 60 });
    for class in [EdgeClass::EO2, EdgeClass::EO3].iter().copied() {
        ctx.set_params(
            0,
            0,
            SaoGroup::Luma,
            SaoParams {
                mode: SaoMode::Edge {
                    class,
                    offsets: [[5, 0, 0, -5], [0; 4]],
                },
                ..Default::default()
            },
        )
        .unwrap();
        let mut dst = Plane::<u8>::new(64, 64, 0, 0, 0, 0);
        ctx.reconstruct_ctu(0, 0, Y_C, &src, &mut dst);
        for &(x, y) in [(0, 0), (63, 0), (0, 63), (63, 63)].iter() {
            assert_eq!(dst.p(x, y), src.p(x, y), "{} ({}, {})", class, x, y);
        }
        assert_eq!(dst.p(1, 1), 60 - 5);
        assert_eq!(dst.p(2, 1), 50 + 5);
    }
}

fn transpose(p: &Plane<u8>) -> Plane<u8> {
    let mut t = Plane::<u8>::new(p.cfg.height, p.cfg.width, 0, 0, 0, 0);
    fill_plane(&mut t, |x, y| p.p(y, x) as u32);
    t
}

#[test]
fn transposed_input_swaps_eo0_and_eo1() {
    let cfg = setup_config(64, 64, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (_, rec) = noisy_pair::<u8>(64, 64, ChromaSampling::Cs400, 8, 13);
    let src = &rec.planes[Y_C];
    let offsets = [[4, 2, -1, -6], [0; 4]];

    ctx.set_params(
        0,
        0,
        SaoGroup::Luma,
        SaoParams {
            mode: SaoMode::Edge {
                class: EdgeClass::EO0,
                offsets,
            },
            ..Default::default()
        },
    )
    .unwrap();
    let mut dst = Plane::<u8>::new(64, 64, 0, 0, 0, 0);
    ctx.reconstruct_ctu(0, 0, Y_C, src, &mut dst);

    ctx.set_params(
        0,
        0,
        SaoGroup::Luma,
        SaoParams {
            mode: SaoMode::Edge {
                class: EdgeClass::EO1,
                offsets,
            },
            ..Default::default()
        },
    )
    .unwrap();
    let src_t = transpose(src);
    let mut dst_t = Plane::<u8>::new(64, 64, 0, 0, 0, 0);
    ctx.reconstruct_ctu(0, 0, Y_C, &src_t, &mut dst_t);

    assert_eq!(plane_rows(&transpose(&dst_t)), plane_rows(&dst));
}

#[test]
fn transposed_search_swaps_class() {
    let cfg = setup_config(64, 64, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let (orig, rec) = ripple_pair(64, 64);
    let mut ctx = setup_context::<u8>(&cfg);
    ctx.search_ctu(0, 0, &orig, &rec);
    let p = *ctx.params(0, 0, SaoGroup::Luma).unwrap();

    let mut orig_t = Frame::<u8>::new(64, 64, ChromaSampling::Cs400);
    let mut rec_t = Frame::<u8>::new(64, 64, ChromaSampling::Cs400);
    orig_t.planes[Y_C] = transpose(&orig.planes[Y_C]);
    rec_t.planes[Y_C] = transpose(&rec.planes[Y_C]);
    let mut ctx_t = setup_context::<u8>(&cfg);
    ctx_t.search_ctu(0, 0, &orig_t, &rec_t);
    let p_t = *ctx_t.params(0, 0, SaoGroup::Luma).unwrap();

    assert_eq!(p.edge_class(), Some(EdgeClass::EO0));
    assert_eq!(p_t.edge_class(), Some(EdgeClass::EO1));
    assert_eq!(p_t.offsets(), p.offsets());
    assert_eq!(p_t.distortion, p.distortion);
}

#[test]
fn in_place_reads_filtered_neighbors() {
    let cfg = setup_config(150, 90, 8, ChromaSampling::Cs420, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (orig, rec) = noisy_pair::<u8>(150, 90, ChromaSampling::Cs420, 8, 17);
    ctx.search_frame(&orig, &rec);

    let mut buf = rec.clone();
    for c in 0..N_C {
        for cy in 0..ctx.ctu_rows() {
            for cx in 0..ctx.ctu_cols() {
                let snapshot = buf.planes[c].clone();
                let mut expected = buf.planes[c].clone();
                ctx.reconstruct_ctu(cx, cy, c, &snapshot, &mut expected);
                ctx.reconstruct_ctu_in_place(cx, cy, c, &mut buf.planes[c]);
                assert_eq!(
                    plane_rows(&buf.planes[c]),
                    plane_rows(&expected),
                    "plane {} ctu ({}, {})",
                    c,
                    cx,
                    cy
                );
            }
        }
    }
}

#[interpolate_test(edge, SAO_FEATURE_EDGE)]
#[interpolate_test(band, SAO_FEATURE_BAND)]
#[interpolate_test(all, SAO_FEATURE_ALL)]
fn simd_matches_scalar(feature_mask: u8) {
    let (w, h) = (150, 90);
    let (orig, rec) = noisy_pair::<u8>(w, h, ChromaSampling::Cs420, 8, 23);

    let run = |cpu: CpuFeatureLevel| {
        let cfg = setup_config(w, h, 8, ChromaSampling::Cs420, feature_mask, Some(cpu));
        let mut ctx = setup_context::<u8>(&cfg);
        ctx.search_frame(&orig, &rec);
        let mut out = Frame::<u8>::new(w, h, ChromaSampling::Cs420);
        ctx.reconstruct_frame(&rec, &mut out);
        (
            records(&ctx, SaoGroup::Luma),
            records(&ctx, SaoGroup::Chroma),
            frame_rows(&out),
        )
    };

    let reference = run(CpuFeatureLevel::RUST);
    for &cpu in CpuFeatureLevel::all() {
        assert_eq!(run(cpu), reference, "{:?}", cpu);
    }
}

#[test]
fn search_decisions_are_valid() {
    let (w, h) = (200, 130);
    let cfg = setup_config(w, h, 8, ChromaSampling::Cs420, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (orig, rec) = noisy_pair::<u8>(w, h, ChromaSampling::Cs420, 8, 29);
    ctx.search_frame(&orig, &rec);

    let cols = ctx.ctu_cols();
    for group in [SaoGroup::Luma, SaoGroup::Chroma].iter().copied() {
        let recs = records(&ctx, group);
        assert_eq!(recs.len(), cols * ctx.ctu_rows());
        assert!(recs.iter().any(|p| p.kind() != SaoKind::None));
        for (i, p) in recs.iter().enumerate() {
            assert!(p.is_valid(8), "{} {:?}", group, p);
            match p.merge {
                SaoMerge::Left => assert_eq!(p.mode, recs[i - 1].mode),
                SaoMerge::Up => assert_eq!(p.mode, recs[i - cols].mode),
                SaoMerge::None => {}
            }
        }
    }
}

#[test]
fn ten_bit_search_and_reconstruct() {
    let (w, h) = (130, 70);
    let cfg = setup_config(w, h, 10, ChromaSampling::Cs420, SAO_FEATURE_ALL, None);
    assert!(Context::<u8>::init(&cfg, SaoSbacCtx::default()).is_err());

    let mut ctx = setup_context::<u16>(&cfg);
    let (orig, rec) = noisy_pair::<u16>(w, h, ChromaSampling::Cs420, 10, 31);
    ctx.search_frame(&orig, &rec);
    for group in [SaoGroup::Luma, SaoGroup::Chroma].iter().copied() {
        for p in records(&ctx, group) {
            assert!(p.is_valid(10), "{:?}", p);
        }
    }

    let mut out = Frame::<u16>::new(w, h, ChromaSampling::Cs420);
    ctx.reconstruct_frame(&rec, &mut out);
    for plane in out.planes.iter() {
        assert!(plane.rows_iter().all(|r| r.iter().all(|&v| v <= 1023)));
    }
}

#[test]
fn out_of_grid_calls_are_ignored() {
    let cfg = setup_config(64, 64, 8, ChromaSampling::Cs400, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    let (orig, rec) = ripple_pair(64, 64);
    ctx.search_ctu(1, 0, &orig, &rec);
    assert_eq!(ctx.params(1, 0, SaoGroup::Luma), None);
    assert!(ctx
        .set_params(0, 1, SaoGroup::Luma, SaoParams::default())
        .is_err());

    let mut dst = rec.planes[Y_C].clone();
    ctx.reconstruct_ctu(0, 0, U_C, &rec.planes[Y_C], &mut dst);
    ctx.reconstruct_ctu(0, 3, Y_C, &rec.planes[Y_C], &mut dst);
    assert_eq!(plane_rows(&dst), plane_rows(&rec.planes[Y_C]));
}

#[test]
fn settings_and_reset() {
    let cfg = setup_config(64, 64, 8, ChromaSampling::Cs420, SAO_FEATURE_ALL, None);
    let mut ctx = setup_context::<u8>(&cfg);
    assert!(ctx.set_lambda(0.0).is_err());
    ctx.set_lambda(12.5).unwrap();
    assert_eq!(ctx.config().lambda, 12.5);
    ctx.set_rate_ctx(SaoSbacCtx {
        sao_merge_flag: [100 << 1],
        sao_type_idx: [300 << 1 | 1],
    });

    let bad = SaoParams {
        mode: SaoMode::Band {
            position: [30, 0],
            offsets: [[0; 4]; 2],
        },
        ..Default::default()
    };
    assert!(ctx.set_params(0, 0, SaoGroup::Chroma, bad).is_err());

    let (orig, rec) = noisy_pair::<u8>(64, 64, ChromaSampling::Cs420, 8, 37);
    ctx.search_frame(&orig, &rec);
    ctx.reset();
    assert_eq!(*ctx.params(0, 0, SaoGroup::Luma).unwrap(), SaoParams::default());
    assert_eq!(*ctx.params(0, 0, SaoGroup::Chroma).unwrap(), SaoParams::default());
    ctx.teardown().unwrap();
}
