//! Variable and attribute names of baseline D array products.

use crate::layout::FieldGroup::{self, Corrections, Data1Hz};

/// Low-rate time, TAI seconds since 2000-01-01. Its length is the record count.
pub const TIME_LOW_RATE: &str = "time_cor_01";
/// High-rate time, TAI seconds since 2000-01-01.
pub const TIME_HIGH_RATE: &str = "time_20_ku";
/// Index of each record's first high-rate sample.
pub const FIRST_INDEX: &str = "ind_first_meas_20hz_01";
/// Number of high-rate samples per record.
pub const VALID_COUNT: &str = "num_valid_01";

pub const ABS_ORBIT_ATTRIBUTE: &str = "abs_orbit_number";
pub const ASCENDING_FLAG_ATTRIBUTE: &str = "ascending_flag";

/// Low-rate field, group and source variable.
pub const LOW_RATE_VARIABLES: &[(FieldGroup, &str, &str)] = &[
    (Data1Hz, "Lat_1Hz", "lat_01"),
    (Data1Hz, "Lon_1Hz", "lon_01"),
    (Data1Hz, "Alt_1Hz", "alt_01"),
    (Data1Hz, "Roll", "off_nadir_roll_angle_str_01"),
    (Data1Hz, "Pitch", "off_nadir_pitch_angle_str_01"),
    (Data1Hz, "Yaw", "off_nadir_yaw_angle_str_01"),
    (Data1Hz, "N_valid", VALID_COUNT),
    (Corrections, "dryTrop", "mod_dry_tropo_cor_01"),
    (Corrections, "wetTrop", "mod_wet_tropo_cor_01"),
    (Corrections, "InvBar", "inv_bar_cor_01"),
    (Corrections, "DAC", "hf_fluct_total_cor_01"),
    (Corrections, "Iono", "iono_cor_01"),
    (Corrections, "Iono_GIM", "iono_cor_gim_01"),
    (Corrections, "SSB", "sea_state_bias_01_ku"),
    (Corrections, "ocTideElv", "ocean_tide_01"),
    (Corrections, "lpeTideElv", "ocean_tide_eq_01"),
    (Corrections, "olTideElv", "load_tide_01"),
    (Corrections, "seTideElv", "solid_earth_tide_01"),
    (Corrections, "gpTideElv", "pole_tide_01"),
    (Corrections, "Geoid", "geoid_01"),
    (Corrections, "MSS", "mean_sea_surf_sea_ice_01"),
    (Corrections, "ODLE", "odle_01"),
    (Corrections, "Ice_conc", "sea_ice_concentration_01"),
    (Corrections, "Snow_depth", "snow_depth_01"),
    (Corrections, "Snow_density", "snow_density_01"),
    (Corrections, "C_status", "flag_cor_err_01"),
    (Corrections, "SWH", "swh_ocean_01_ku"),
    (Corrections, "Wind_speed", "wind_speed_alt_01_ku"),
];

/// High-rate field and source variable.
pub const HIGH_RATE_VARIABLES: &[(&str, &str)] = &[
    ("Time", TIME_HIGH_RATE),
    ("Lat", "lat_poca_20_ku"),
    ("Lon", "lon_poca_20_ku"),
    ("Elev_1", "height_1_20_ku"),
    ("Elev_2", "height_2_20_ku"),
    ("Elev_3", "height_3_20_ku"),
    ("Sig0_1", "sig0_1_20_ku"),
    ("Sig0_2", "sig0_2_20_ku"),
    ("Sig0_3", "sig0_3_20_ku"),
    ("Range_1", "range_1_20_ku"),
    ("Range_2", "range_2_20_ku"),
    ("Range_3", "range_3_20_ku"),
    ("Freeboard", "freeboard_20_ku"),
    ("Sea_Ice_Floe", "height_sea_ice_floe_20_ku"),
    ("Sea_Ice_Lead", "height_sea_ice_lead_20_ku"),
    ("SSHA_interp", "ssha_interp_20_ku"),
    ("SSHA_interp_count", "ssha_interp_numval_20_ku"),
    ("SSHA_interp_RMS", "ssha_interp_rms_20_ku"),
    ("Peakiness", "peakiness_20_ku"),
    ("N_avg", "echo_avg_numval_20_ku"),
    ("Quality_flag", "flag_prod_status_20_ku"),
    ("Corrections_flag", "flag_cor_applied_20_ku"),
    ("Measurement_Mode", "flag_instr_mode_op_20_ku"),
    ("Surf_type", "surf_type_20_ku"),
    ("Quality_1", "retracker_1_quality_20_ku"),
    ("Quality_2", "retracker_2_quality_20_ku"),
    ("Quality_3", "retracker_3_quality_20_ku"),
];

/// MPH key and source attribute.
pub const MPH_ATTRIBUTES: &[(&str, &str)] = &[
    ("PRODUCT", "product_name"),
    ("DOI", "doi"),
    ("PROC_STAGE", "processing_stage"),
    ("REF_DOC", "reference_document"),
    ("ACQUISITION_STATION", "acquisition_station"),
    ("PROC_CENTER", "processing_centre"),
    ("PROC_TIME", "creation_time"),
    ("SOFTWARE_VER", "software_version"),
    ("SENSING_START", "sensing_start"),
    ("SENSING_STOP", "sensing_stop"),
    ("PHASE", "phase"),
    ("CYCLE", "cycle_number"),
    ("REL_ORBIT", "rel_orbit_number"),
    ("ABS_ORBIT", ABS_ORBIT_ATTRIBUTE),
    ("STATE_VECTOR_TIME", "state_vector_time"),
    ("DELTA_UT1", "delta_ut1"),
    ("X_POSITION", "x_position"),
    ("Y_POSITION", "y_position"),
    ("Z_POSITION", "z_position"),
    ("X_VELOCITY", "x_velocity"),
    ("Y_VELOCITY", "y_velocity"),
    ("Z_VELOCITY", "z_velocity"),
    ("VECTOR_SOURCE", "vector_source"),
    ("LEAP_UTC", "leap_utc"),
    ("LEAP_SIGN", "leap_sign"),
    ("LEAP_ERR", "leap_err"),
    ("PRODUCT_ERR", "product_err"),
];

/// SPH key and source attribute. All required.
pub const SPH_ATTRIBUTES: &[(&str, &str)] = &[
    ("START_RECORD_TAI_TIME", "first_record_time"),
    ("STOP_RECORD_TAI_TIME", "last_record_time"),
    ("ABS_ORBIT_START", "abs_orbit_start"),
    ("REL_TIME_ASC_NODE_START", "rel_time_acs_node_start"),
    ("ABS_ORBIT_STOP", "abs_orbit_stop"),
    ("REL_TIME_ASC_NODE_STOP", "rel_time_acs_node_stop"),
    ("EQUATOR_CROSS_TIME_UTC", "equator_cross_time"),
    ("EQUATOR_CROSS_LONG", "equator_cross_long"),
    ("ASCENDING_FLAG", ASCENDING_FLAG_ATTRIBUTE),
    ("START_LAT", "first_record_lat"),
    ("START_LONG", "first_record_lon"),
    ("STOP_LAT", "last_record_lat"),
    ("STOP_LONG", "last_record_lon"),
    ("L1_PROC_FLAG", "l1b_proc_flag"),
    ("L1_PROCESSING_QUALITY", "l1b_processing_quality"),
    ("L1_PROC_THRESH", "l1b_proc_thresh"),
    ("INSTR_ID", "instr_id"),
    ("LRM_MODE_PERCENT", "lrm_mode_percent"),
    ("SAR_MODE_PERCENT", "sar_mode_percent"),
    ("SARIN_MODE_PERCENT", "sarin_mode_percent"),
    ("OPEN_OCEAN_PERCENT", "open_ocean_percent"),
    ("CLOSE_SEA_PERCENT", "close_sea_percent"),
    ("CONTINENT_ICE_PERCENT", "continent_ice_percent"),
    ("LAND_PERCENT", "land_percent"),
    ("L2_PROD_STATUS", "l2_prod_status"),
    ("L2_PROC_FLAG", "l2_proc_flag"),
    ("L2_PROCESSING_QUALITY", "l2_processing_quality"),
    ("L2_PROC_THRESH", "l2_proc_thresh"),
    ("SIR_CONFIGURATION", "sir_configuration"),
    ("SIR_OP_MODE", "sir_op_mode"),
    ("ORBIT_FILE", "xref_orbit"),
    ("PROC_CONFIG_PARAMS_FILE", "xref_pconf"),
    ("CONSTANTS_FILE", "xref_constants"),
    ("IPF_RA_DATABASE_FILE", "xref_siral_characterisation"),
    ("DORIS_USO_DRIFT_FILE", "xref_uso"),
    ("STAR_TRACKER_ATTREF_FILE", "xref_star_tracker_attref"),
    ("SIRAL_LEVEL_0_FILE", "xref_siral_l0"),
    ("CALIBRATION_TYPE_1_FILE", "xref_cal1"),
    ("SIR_COMPLEX_CAL1_SARIN", "xref_cal1_sarin"),
    ("SCENARIO_FILE", "xref_orbit_scenario"),
    ("CALIBRATION_TYPE_2_FILE", "xref_cal2"),
    ("SURFACE_PRESSURE_FILE", "xref_surf_pressure"),
    ("MEAN_PRESSURE_FILE", "xref_mean_pressure"),
    ("WET_TROPOSPHERE_FILE", "xref_wet_trop"),
    ("U_WIND_FILE", "xref_u_wind"),
    ("V_WIND_FILE", "xref_v_wind"),
    ("METEO_GRID_DEF_FILE", "xref_meteo"),
    ("S1S2_PRESSURE_00H_MAP", "xref_s1s2_pressure_00h"),
    ("S1S2_PRESSURE_06H_MAP", "xref_s1s2_pressure_06h"),
    ("S1S2_PRESSURE_12H_MAP", "xref_s1s2_pressure_12h"),
    ("S1S2_PRESSURE_18H_MAP", "xref_s1s2_pressure_18h"),
    ("S1_TIDE_AMPLITUDE_MAP", "xref_s1_tide_amplitude"),
    ("S1_TIDE_PHASE_MAP", "xref_s1_tide_phase"),
    ("S2_TIDE_AMPLITUDE_MAP", "xref_s2_tide_amplitude"),
    ("S2_TIDE_PHASE_MAP", "xref_s2_tide_phase"),
    ("GPS_IONO_MAP", "xref_gim"),
    ("MODIFIED_DIP_MAP_FILE", "xref_dip_map"),
    ("IONO_COEFFICENTS_FILE", "xref_iono_cor"),
    ("SAI_FILE", "xref_sai"),
    ("OCEAN_TIDE_FILE", "xref_ocean_tide"),
    ("TIDAL_LOADING_FILE", "xref_tidal_load"),
    ("EARTH_TIDE_FILE", "xref_earth_tide"),
    ("POLE_TIDE_FILE", "xref_pole_location"),
    ("SURFACE_TYPE_FILE", "xref_surf_type"),
    ("AUX_MOG2D", "xref_mog2d"),
    ("SIRAL_LEVEL_1B_FILE", "xref_siral_l1b"),
    ("MEAN_SEA_SURFACE_FILE", "xref_mss"),
    ("GEOID_FILE", "xref_geoid"),
    ("ODLE_FILE", "xref_odle"),
];

/// SPH entries only some processing chains write.
pub const OPTIONAL_SPH_ATTRIBUTES: &[(&str, &str)] = &[
    ("DEM_MODEL_FILE", "xref_dem"),
    ("SEA_ICE_FILE", "xref_sea_ice"),
    ("SNOW_DEPTH_FILE", "xref_snow_depth"),
];
