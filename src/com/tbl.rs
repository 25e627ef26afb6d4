/* neighbour displacement (dx, dy) of samples a and b for each edge class */
pub(crate) static evc_tbl_sao_eo_offsets: [[(isize, isize); 2]; 4] = [
    [(-1, 0), (1, 0)],   /* EO0: horizontal */
    [(0, -1), (0, 1)],   /* EO1: vertical */
    [(-1, -1), (1, 1)],  /* EO2: 135 degrees */
    [(1, -1), (-1, 1)],  /* EO3: 45 degrees */
];

/* sign(c-a) + sign(c-b) + 2 to edge category */
pub(crate) static evc_tbl_sao_eo_remap: [u8; 5] = [1, 2, 0, 3, 4];
