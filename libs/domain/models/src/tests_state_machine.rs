// [libs/domain/models/src/tests_state_machine.rs]
/**
 * =================================================================
 * APARATO: STATE MACHINE CERTIFICATION (V2.0 - DAG EVIDENCE)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-MODELS)
 * RESPONSABILIDAD: CERTIFICACIÓN DE ARISTAS LEGALES Y ABSORCIÓN TERMINAL
 *
 * # Mathematical Proof (Edge Enumeration):
 * El espacio de transiciones MP4 es 5x5 = 25 pares. El test enumera la
 * matriz completa y verifica que exactamente las 6 aristas del DAG
 * declarado sean legales; toda arista hacia atrás queda vetada.
 * =================================================================
 */
